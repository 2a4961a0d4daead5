mod claims;
mod context;
mod middleware;

pub use claims::{verify_token, Claims};
pub use context::{AuthContext, Role};
pub use middleware::{RequireAdmin, RequireAuth};
