pub mod dispatch_service;
pub mod dispatcher;
pub mod push_gateway;
pub mod token_store;

pub use dispatch_service::DispatchService;
pub use dispatcher::NotificationDispatcher;
pub use push_gateway::PushGateway;
pub use token_store::{valid_tokens, SupabaseTokenStore, TokenStore, TokenStoreError};
