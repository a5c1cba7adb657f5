pub mod audit;
pub mod callback_processor;
pub mod redirect;
