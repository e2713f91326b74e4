pub mod about;
pub mod cache;
pub mod comment;
pub mod create_user;
pub mod error_page;
pub mod feed;
pub mod global;
pub mod group;
pub mod index;
pub mod init;
pub mod login;
pub mod logout;
pub mod member;
pub mod middleware;
pub mod orm;
pub mod post;
pub mod session;
pub mod url;
pub mod user;
