// Public rendering: content accessor, HTML templates, articles and the static
// export

pub mod accessor;
pub mod articles;
pub mod build;
pub mod template;

pub use accessor::ContentAccessor;
pub use articles::{Article, load_articles, parse_article};
pub use build::{BuildSummary, build_static_site};
pub use template::{
    html_escape, render_article_index, render_article_page, render_landing_page,
    render_not_found,
};
