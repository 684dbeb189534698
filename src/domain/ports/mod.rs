//! Ports the application layer depends on and infrastructure implements.

pub mod code_generator;
pub mod password_hasher;
pub mod token_digester;
pub mod unit_of_work;

pub use code_generator::CodeGenerator;
pub use password_hasher::PasswordHasher;
pub use token_digester::TokenDigester;
pub use unit_of_work::{BoxFuture, Transaction, UnitOfWork, run};

#[cfg(test)]
pub use token_digester::MockTokenDigester;
#[cfg(test)]
pub use unit_of_work::MockUnitOfWork;
