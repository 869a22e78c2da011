use error::MetainfoError;

pub mod check;
pub mod component;
pub mod error;
pub mod relation;
pub mod score;
pub mod system_info;

pub type MetainfoResult<T> = std::result::Result<T, MetainfoError>;
