pub mod assumptions;
pub mod lbo;
pub mod projection;
pub mod returns;
pub mod sensitivity;
