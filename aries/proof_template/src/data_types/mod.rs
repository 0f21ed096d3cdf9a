pub mod pres_request;
pub mod restrictions;
pub mod template;
