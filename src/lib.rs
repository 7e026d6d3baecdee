pub mod layers;
pub mod opt;
