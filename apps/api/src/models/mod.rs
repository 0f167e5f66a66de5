pub mod assessment;
pub mod work;
