pub mod chat;
pub mod run;
