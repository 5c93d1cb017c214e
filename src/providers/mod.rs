pub mod eclesiar;
