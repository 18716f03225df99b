// src/browser.rs
//
// Lado "cliente" do CRM: busca a tabela inteira, filtra localmente e
// reconcilia o estado local com as respostas do servidor.

pub mod auth;
pub mod client;
pub mod filter;
pub mod session;

pub use auth::{AuthGate, AuthSession};
pub use client::{ClientError, PropertyApi, StoreClient};
pub use filter::{NumericRange, PropertyFilter};
pub use session::{Notice, NoticeKind, PropertyBrowser};
