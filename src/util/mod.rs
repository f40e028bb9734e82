pub mod data;
pub mod svd;
