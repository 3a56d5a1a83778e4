pub mod creator;
pub mod device_tools;
pub mod services;
pub mod xml;
