//! Data models
//!
//! Database entities (User, Session, Category, Location, Post, Comment),
//! request inputs, and the joined views returned by listings.

mod category;
mod comment;
mod location;
pub mod pagination;
mod post;
mod session;
mod user;

pub use category::{Category, CategoryRef, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CommentInput, CommentView};
pub use location::{CreateLocationInput, Location, LocationRef, UpdateLocationInput};
pub use pagination::{Page, PageRequest, PageWindow, Paginator, POSTS_PER_PAGE};
pub use post::{is_post_image_path, AuthorRef, Post, PostFilter, PostInput, PostView, POST_IMAGES_DIR};
pub use session::Session;
pub use user::{CreateUserInput, UpdateProfileInput, User, UserRole};
