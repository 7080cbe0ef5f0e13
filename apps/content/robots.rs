pub const ROBOTS_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

const DISALLOWED_PATHS: [&str; 6] = [
    "/api/",
    "/admin/",
    "/wp-admin/",
    "/wp-json/",
    "/_next/",
    "/_vercel/",
];

pub fn render_robots(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let mut robots = String::from("User-agent: *\nAllow: /\n\n");
    for path in DISALLOWED_PATHS {
        robots.push_str("Disallow: ");
        robots.push_str(path);
        robots.push('\n');
    }
    robots.push_str(&format!("\nSitemap: {base_url}/sitemap.xml\n"));
    robots
}
