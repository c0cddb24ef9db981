pub mod credential;
pub mod facts;
