//! Collaborator contracts the host application implements

mod account_repository;
mod price_service;
mod transaction_repository;

pub use account_repository::AccountRepository;
pub use price_service::PriceService;
pub use transaction_repository::TransactionRepository;
