pub mod movie;
pub mod movie_info;
pub mod review;
pub mod session;
pub mod user;
