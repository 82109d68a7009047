pub mod classify;
pub mod derive;
pub mod diagnosis;
pub mod extraction;
pub mod inference;
pub mod processor;
pub mod retry;
