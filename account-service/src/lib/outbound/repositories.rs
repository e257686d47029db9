pub mod account;
pub mod memory;
pub mod verification_token;

pub use account::PostgresAccountRepository;
pub use memory::InMemoryStore;
pub use verification_token::PostgresVerificationTokenRepository;
