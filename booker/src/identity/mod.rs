pub mod model;
pub mod provisioner;
pub mod tokens;

pub use model::GuestIdentity;
pub use provisioner::IdentityProvisioner;
pub use tokens::{MarkupTokenExtractor, MissingToken, PageTokenExtractor, SignupTokens};
