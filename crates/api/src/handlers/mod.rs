pub mod blocks;
pub mod guide;
pub mod items;
pub mod media;
pub mod nav_links;
pub mod products;
pub mod render;
pub mod subcategories;
