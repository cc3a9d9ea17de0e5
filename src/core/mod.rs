pub mod alert;
pub mod change_point;
pub mod currency;
pub mod observation;
