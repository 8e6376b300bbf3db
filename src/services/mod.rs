//! Request-independent business operations. Each service holds the injected
//! store and performs the reads and (atomic) writes for one area.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod comments;
pub mod favorites;
pub mod users;

pub use auth::{AuthError, Claims, TokenIssuer, TokenKind, TokenPair};
pub use cart::{CartService, CartView};
pub use catalog::CatalogService;
pub use comments::{CommentBody, CommentService};
pub use favorites::FavoriteService;
pub use users::{LoginRequest, SignUpRequest, UserService};
