mod credentials;
mod token;

pub use credentials::SheetsCredential;
pub(crate) use token::TokenProvider;
