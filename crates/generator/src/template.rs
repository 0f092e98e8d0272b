use crate::articles::Article;
use villa_site_core::{
    GlobalContent, HeaderSettings, NavLink, PageContent, SeoSettings,
};
use villa_site_gallery::GalleryListing;

const DEFAULT_SITE_NAME: &str = "Private Villa";
const DEFAULT_SLOGAN: &str = "Your home by the sea";
const DEFAULT_DESCRIPTION: &str =
    "A private luxury villa with pool, wellness area and concierge service.";
const DEFAULT_HERO_TITLE: &str = "Welcome to the Villa";
const DEFAULT_HERO_SUBTITLE: &str = "Space, light and the sea on your doorstep";
const DEFAULT_CTA_LABEL: &str = "Check availability";
const DEFAULT_GALLERY_TITLE: &str = "Gallery";
const DEFAULT_CONTACT_TITLE: &str = "Get in touch";

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn text_or<'a>(value: Option<&'a String>, default: &'a str) -> &'a str {
    value
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

fn paragraphs(items: &[String]) -> String {
    items
        .iter()
        .map(|p| format!("<p>{}</p>", html_escape(p)))
        .collect()
}

fn default_nav() -> Vec<NavLink> {
    [
        ("#villa", "The Villa"),
        ("#amenities", "Amenities"),
        ("#gallery", "Gallery"),
        ("#location", "Location"),
        ("/articles", "Journal"),
        ("#contact", "Contact"),
    ]
    .into_iter()
    .map(|(href, label)| NavLink {
        href: href.to_string(),
        label: label.to_string(),
    })
    .collect()
}

/// Page chrome shared by the landing page and the article pages
fn layout(global: &GlobalContent, title: &str, description: &str, body: &str) -> String {
    let seo = &global.seo;
    let header = &global.header;
    let footer = &global.footer;

    let nav_links = header
        .nav_links
        .clone()
        .filter(|links| !links.is_empty())
        .unwrap_or_else(default_nav);
    let nav_html: String = nav_links
        .iter()
        .map(|link| {
            format!(
                r#"<a href="{}">{}</a>"#,
                html_escape(&link.href),
                html_escape(&link.label)
            )
        })
        .collect();

    let booking_html = header
        .booking_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .map(|url| {
            format!(
                r#"<a class="button" href="{}">Book now</a>"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();

    let keywords = seo
        .keywords
        .as_ref()
        .map(|k| k.join(", "))
        .unwrap_or_default();

    let footer_brand = text_or(footer.brand_name.as_ref(), &header.brand_name);
    let footer_lines: String = [
        footer.tagline.as_ref(),
        footer.address.as_ref(),
        footer.phone.as_ref(),
        footer.email.as_ref(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.trim().is_empty())
    .map(|s| format!("<p>{}</p>", html_escape(s)))
    .collect();
    let managed_by = match (&footer.managed_by, &footer.managed_by_url) {
        (Some(name), Some(url)) => format!(
            r#"<p class="managed">Managed by <a href="{}">{}</a></p>"#,
            html_escape(url),
            html_escape(name)
        ),
        (Some(name), None) => format!(r#"<p class="managed">Managed by {}</p>"#, html_escape(name)),
        _ => String::new(),
    };
    let copyright = text_or(footer.copyright.as_ref(), footer_brand);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <meta name="keywords" content="{keywords}">
    <style>
        :root {{
            --sand: #f4efe6;
            --sea: #1f4e5f;
            --sun: #d9a441;
            --ink: #1d1d1b;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: Georgia, "Times New Roman", serif;
            line-height: 1.7;
            color: var(--ink);
            background: var(--sand);
        }}
        header.site {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            padding: 1rem 2rem;
            background: var(--sea);
            color: white;
        }}
        header.site nav a {{ color: white; margin-left: 1.2rem; text-decoration: none; }}
        .brand {{ font-size: 1.4rem; letter-spacing: 0.08em; color: white; text-decoration: none; }}
        .button {{
            background: var(--sun);
            color: var(--ink);
            padding: 0.6rem 1.2rem;
            border-radius: 2px;
            text-decoration: none;
        }}
        section {{ padding: 4rem 2rem; max-width: 1100px; margin: 0 auto; }}
        .hero {{
            max-width: none;
            min-height: 70vh;
            display: flex;
            flex-direction: column;
            justify-content: center;
            color: white;
            background: var(--sea) center / cover no-repeat;
            text-align: center;
        }}
        .eyebrow {{ text-transform: uppercase; letter-spacing: 0.2em; font-size: 0.8rem; }}
        h1 {{ font-size: 3rem; margin: 0.5rem 0; }}
        h2 {{ font-size: 2rem; margin-bottom: 1rem; color: var(--sea); }}
        .marquee {{ overflow: hidden; white-space: nowrap; background: var(--sun); padding: 0.8rem 0; }}
        .marquee span {{ margin: 0 2rem; }}
        .stats {{ display: flex; gap: 2rem; margin: 1.5rem 0; }}
        .stat strong {{ display: block; font-size: 1.8rem; color: var(--sea); }}
        .grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1.5rem; }}
        .grid img {{ width: 100%; height: 200px; object-fit: cover; }}
        .filters button {{ margin: 0 0.4rem 1rem 0; padding: 0.4rem 0.9rem; border: 1px solid var(--sea); background: none; cursor: pointer; }}
        .filters button.active {{ background: var(--sea); color: white; }}
        .map iframe {{ width: 100%; height: 360px; border: 0; }}
        article.post {{ max-width: 760px; }}
        article.post p, article.post ul {{ margin-bottom: 1rem; }}
        .date {{ color: #777; font-size: 0.9rem; }}
        footer {{ background: var(--ink); color: #ccc; padding: 3rem 2rem; text-align: center; }}
        footer a {{ color: var(--sun); }}
        @media (max-width: 768px) {{
            header.site {{ flex-direction: column; gap: 0.5rem; }}
            header.site nav a {{ margin: 0 0.5rem; }}
            h1 {{ font-size: 2rem; }}
        }}
    </style>
</head>
<body>
    <header class="site">
        <a class="brand" href="/">{brand}</a>
        <nav>{nav}</nav>
        {booking}
    </header>
    <main>
{body}
    </main>
    <footer>
        <h3>{footer_brand}</h3>
        {footer_lines}
        {managed_by}
        <p>&copy; {copyright}</p>
    </footer>
</body>
</html>"#,
        title = html_escape(title),
        description = html_escape(description),
        keywords = html_escape(&keywords),
        brand = html_escape(&header.brand_name),
        nav = nav_html,
        booking = booking_html,
        body = body,
        footer_brand = html_escape(footer_brand),
        footer_lines = footer_lines,
        managed_by = managed_by,
        copyright = html_escape(copyright),
    )
}

/// Global settings with defaults filled in for anything missing
fn effective_global(global: Option<&GlobalContent>) -> GlobalContent {
    let mut global = global.cloned().unwrap_or_else(|| GlobalContent {
        seo: SeoSettings {
            site_name: DEFAULT_SITE_NAME.to_string(),
            slogan: Some(DEFAULT_SLOGAN.to_string()),
            description: Some(DEFAULT_DESCRIPTION.to_string()),
            keywords: None,
        },
        header: HeaderSettings {
            brand_name: DEFAULT_SITE_NAME.to_string(),
            booking_url: None,
            nav_links: None,
        },
        footer: Default::default(),
    });
    if global.seo.site_name.trim().is_empty() {
        global.seo.site_name = DEFAULT_SITE_NAME.to_string();
    }
    if global.header.brand_name.trim().is_empty() {
        global.header.brand_name = global.seo.site_name.clone();
    }
    global
}

/// Render the landing page.
///
/// Both documents are optional; every missing section or field falls back to
/// built-in text so the page always renders.
pub fn render_landing_page(
    global: Option<&GlobalContent>,
    page: Option<&PageContent>,
    gallery: &GalleryListing,
    articles: &[Article],
) -> String {
    let global = effective_global(global);
    let page = page.cloned().unwrap_or_default();
    let seo = &global.seo;

    let mut body = String::new();
    body.push_str(&render_hero(&page, &global));
    body.push_str(&render_marquee(&page));
    body.push_str(&render_intro(&page));
    body.push_str(&render_amenities(&page));
    body.push_str(&render_concierge(&page));
    body.push_str(&render_gallery(&page, gallery));
    body.push_str(&render_journal(articles));
    body.push_str(&render_map(&page));
    body.push_str(&render_contact(&page, &global));

    let title = match seo.slogan.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(slogan) => format!("{} | {}", seo.site_name, slogan),
        None => seo.site_name.clone(),
    };
    let description = text_or(seo.description.as_ref(), DEFAULT_DESCRIPTION);
    layout(&global, &title, description, &body)
}

fn render_hero(page: &PageContent, global: &GlobalContent) -> String {
    let hero = page.hero.clone().unwrap_or_default();
    let style = hero
        .background_image
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|img| format!(r#" style="background-image: url('{}')""#, html_escape(img)))
        .unwrap_or_default();
    let cta_url = hero
        .cta_url
        .as_ref()
        .or(global.header.booking_url.as_ref())
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("#contact");

    format!(
        r#"<section class="hero"{style}>
    <div class="eyebrow">{eyebrow}</div>
    <h1>{title}</h1>
    <p>{subtitle}</p>
    <p><a class="button" href="{cta_url}">{cta_label}</a></p>
</section>
"#,
        style = style,
        eyebrow = html_escape(text_or(hero.eyebrow.as_ref(), &global.seo.site_name)),
        title = html_escape(text_or(hero.title.as_ref(), DEFAULT_HERO_TITLE)),
        subtitle = html_escape(text_or(hero.subtitle.as_ref(), DEFAULT_HERO_SUBTITLE)),
        cta_url = html_escape(cta_url),
        cta_label = html_escape(text_or(hero.cta_label.as_ref(), DEFAULT_CTA_LABEL)),
    )
}

fn render_marquee(page: &PageContent) -> String {
    let Some(marquee) = page.marquee.as_ref().filter(|m| !m.items.is_empty()) else {
        return String::new();
    };
    let items: String = marquee
        .items
        .iter()
        .map(|item| format!("<span>{}</span>", html_escape(item)))
        .collect();
    format!("<div class=\"marquee\">{}</div>\n", items)
}

fn render_intro(page: &PageContent) -> String {
    let Some(intro) = &page.villa_intro else {
        return String::new();
    };
    let stats: String = intro
        .stats
        .iter()
        .map(|s| {
            format!(
                r#"<div class="stat"><strong>{}</strong>{}</div>"#,
                html_escape(&s.value),
                html_escape(&s.label)
            )
        })
        .collect();
    let images: String = intro
        .gallery_images
        .iter()
        .flatten()
        .map(|img| {
            format!(
                r#"<img src="{}" alt="{}" loading="lazy">"#,
                html_escape(&img.src),
                html_escape(&img.alt)
            )
        })
        .collect();

    format!(
        r#"<section id="villa">
    <div class="eyebrow">{eyebrow}</div>
    <h2>{title}</h2>
    <div class="stats">{stats}</div>
    {body}
    {space}
    <div class="grid">{images}</div>
</section>
"#,
        eyebrow = html_escape(text_or(intro.eyebrow.as_ref(), "")),
        title = html_escape(text_or(intro.title.as_ref(), "The Villa")),
        stats = stats,
        body = paragraphs(&intro.body_paragraphs),
        space = paragraphs(&intro.space_paragraphs),
        images = images,
    )
}

fn render_amenities(page: &PageContent) -> String {
    let Some(amenities) = &page.amenities else {
        return String::new();
    };
    let items: String = amenities
        .items
        .iter()
        .map(|item| {
            let image = if item.image.trim().is_empty() {
                String::new()
            } else {
                format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    html_escape(&item.image),
                    html_escape(&item.name)
                )
            };
            let icon = item
                .icon
                .as_deref()
                .map(|i| format!(r#"<span class="icon">{}</span> "#, html_escape(i)))
                .unwrap_or_default();
            format!("<div>{}<h3>{}{}</h3></div>", image, icon, html_escape(&item.name))
        })
        .collect();

    format!(
        r#"<section id="amenities">
    <h2>{}</h2>
    <p>{}</p>
    <div class="grid">{}</div>
</section>
"#,
        html_escape(text_or(amenities.title.as_ref(), "Amenities")),
        html_escape(text_or(amenities.subtitle.as_ref(), "")),
        items
    )
}

fn render_concierge(page: &PageContent) -> String {
    let Some(concierge) = &page.concierge else {
        return String::new();
    };
    let services: String = concierge
        .services
        .iter()
        .map(|s| format!("<li>{}</li>", html_escape(s)))
        .collect();
    let image = concierge
        .image
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, html_escape(src)))
        .unwrap_or_default();

    format!(
        r#"<section id="concierge">
    <h2>{}</h2>
    {}
    <ul>{}</ul>
    {}
</section>
"#,
        html_escape(text_or(concierge.title.as_ref(), "Concierge")),
        paragraphs(&concierge.paragraphs),
        services,
        image
    )
}

fn render_gallery(page: &PageContent, gallery: &GalleryListing) -> String {
    let section = page.gallery.clone().unwrap_or_default();
    let filters: String = gallery
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                r#"<button data-filter="{}"{}>{}</button>"#,
                html_escape(&c.id),
                if i == 0 { r#" class="active""# } else { "" },
                html_escape(&c.label)
            )
        })
        .collect();
    let items: String = gallery
        .items
        .iter()
        .map(|item| {
            format!(
                r#"<figure data-category="{}"><img src="{}" alt="{}" loading="lazy"><figcaption><strong>{}</strong> {}</figcaption></figure>"#,
                item.category.id(),
                html_escape(&item.src),
                html_escape(&item.alt),
                html_escape(&item.title),
                html_escape(&item.description)
            )
        })
        .collect();

    format!(
        r#"<section id="gallery">
    <h2>{title}</h2>
    <p>{subtitle}</p>
    <div class="filters">{filters}</div>
    <div class="grid">{items}</div>
    <script>
        document.querySelectorAll('.filters button').forEach(btn => {{
            btn.addEventListener('click', () => {{
                const filter = btn.dataset.filter;
                document.querySelectorAll('.filters button').forEach(b => b.classList.toggle('active', b === btn));
                document.querySelectorAll('#gallery figure').forEach(fig => {{
                    fig.style.display = filter === 'all' || fig.dataset.category === filter ? '' : 'none';
                }});
            }});
        }});
    </script>
</section>
"#,
        title = html_escape(text_or(section.title.as_ref(), DEFAULT_GALLERY_TITLE)),
        subtitle = html_escape(text_or(section.subtitle.as_ref(), "")),
        filters = filters,
        items = items,
    )
}

fn render_journal(articles: &[Article]) -> String {
    if articles.is_empty() {
        return String::new();
    }
    let items: String = articles.iter().take(3).map(article_card).collect();
    format!(
        r#"<section id="journal">
    <h2>Journal</h2>
    {}
    <p><a href="/articles">All articles</a></p>
</section>
"#,
        items
    )
}

fn render_map(page: &PageContent) -> String {
    let Some(map) = &page.map else {
        return String::new();
    };
    let embed = map
        .embed_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|url| {
            format!(
                r#"<div class="map"><iframe src="{}" loading="lazy"></iframe></div>"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();
    let distances: String = map
        .distances
        .iter()
        .map(|d| {
            format!(
                "<li><strong>{}</strong> {}</li>",
                html_escape(&d.name),
                html_escape(&d.detail)
            )
        })
        .collect();

    format!(
        r#"<section id="location">
    <h2>{}</h2>
    <p>{}</p>
    {}
    <ul>{}</ul>
</section>
"#,
        html_escape(text_or(map.title.as_ref(), "Location")),
        html_escape(text_or(map.address.as_ref(), "")),
        embed,
        distances
    )
}

fn render_contact(page: &PageContent, global: &GlobalContent) -> String {
    let contact = page.contact.clone().unwrap_or_default();
    let email = contact.email.as_ref().or(global.footer.email.as_ref());
    let phone = contact.phone.as_ref().or(global.footer.phone.as_ref());

    let mut lines = String::new();
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        lines.push_str(&format!(
            r#"<p><a href="mailto:{0}">{0}</a></p>"#,
            html_escape(email)
        ));
    }
    if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
        lines.push_str(&format!(
            r#"<p><a href="tel:{0}">{0}</a></p>"#,
            html_escape(phone)
        ));
    }
    if let Some(whatsapp) = contact.whatsapp.as_ref().filter(|w| !w.trim().is_empty()) {
        let digits: String = whatsapp.chars().filter(char::is_ascii_digit).collect();
        lines.push_str(&format!(
            r#"<p><a href="https://wa.me/{}">WhatsApp</a></p>"#,
            digits
        ));
    }

    format!(
        r#"<section id="contact">
    <h2>{}</h2>
    <p>{}</p>
    {}
</section>
"#,
        html_escape(text_or(contact.title.as_ref(), DEFAULT_CONTACT_TITLE)),
        html_escape(text_or(contact.subtitle.as_ref(), "")),
        lines
    )
}

fn article_card(article: &Article) -> String {
    let summary = article
        .summary
        .as_deref()
        .map(|s| format!("<p>{}</p>", html_escape(s)))
        .unwrap_or_default();
    format!(
        r#"<article><h3><a href="/articles/{}">{}</a></h3><p class="date">{}</p>{}</article>"#,
        html_escape(&article.slug),
        html_escape(&article.title),
        article.date.format("%B %-d, %Y"),
        summary
    )
}

pub fn render_article_index(global: Option<&GlobalContent>, articles: &[Article]) -> String {
    let global = effective_global(global);
    let items: String = if articles.is_empty() {
        "<p>No articles yet.</p>".to_string()
    } else {
        articles.iter().map(article_card).collect()
    };
    let body = format!("<section>\n<h2>Journal</h2>\n{}\n</section>", items);
    let title = format!("Journal | {}", global.seo.site_name);
    let description = text_or(global.seo.description.as_ref(), DEFAULT_DESCRIPTION).to_string();
    layout(&global, &title, &description, &body)
}

/// Article body HTML comes from the markdown renderer and is inserted as is
pub fn render_article_page(global: Option<&GlobalContent>, article: &Article) -> String {
    let global = effective_global(global);
    let cover = article
        .cover
        .as_deref()
        .map(|src| {
            format!(
                r#"<img src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(&article.title)
            )
        })
        .unwrap_or_default();
    let body = format!(
        r#"<section>
<article class="post">
    <h1>{}</h1>
    <p class="date">{}</p>
    {}
    {}
    <p><a href="/articles">Back to the journal</a></p>
</article>
</section>"#,
        html_escape(&article.title),
        article.date.format("%B %-d, %Y"),
        cover,
        article.html
    );
    let title = format!("{} | {}", article.title, global.seo.site_name);
    let description = article.summary.clone().unwrap_or_else(|| article.title.clone());
    layout(&global, &title, &description, &body)
}

pub fn render_not_found(global: Option<&GlobalContent>) -> String {
    let global = effective_global(global);
    let body = r#"<section><h2>Page not found</h2><p><a href="/">Back to the villa</a></p></section>"#;
    let title = format!("Not found | {}", global.seo.site_name);
    layout(&global, &title, DEFAULT_DESCRIPTION, body)
}
