//! GraphQL documents sent to the WordPress backend.

pub const POSTS: &str = r#"
query GetPosts($first: Int!) {
  posts(first: $first) {
    nodes {
      id
      title
      content
      excerpt
      date
      modified
      slug
      featuredImage {
        node {
          sourceUrl
          altText
          mediaDetails {
            width
            height
          }
        }
      }
      categories {
        nodes {
          slug
          name
        }
      }
      author {
        node {
          name
        }
      }
    }
  }
}"#;

pub const POST_BY_SLUG: &str = r#"
query GetPost($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    id
    title
    content
    excerpt
    date
    modified
    slug
    featuredImage {
      node {
        sourceUrl
        altText
        mediaDetails {
          width
          height
        }
      }
    }
    categories {
      nodes {
        slug
        name
      }
    }
    author {
      node {
        name
      }
    }
  }
}"#;

pub const CATEGORIES: &str = r#"
query GetAllCategories($first: Int!, $hideEmpty: Boolean) {
  categories(first: $first, where: { hideEmpty: $hideEmpty }) {
    nodes {
      id
      slug
      name
      count
      description
      parent {
        node {
          id
          slug
          name
        }
      }
    }
  }
}"#;

pub const SITEMAP_POSTS: &str = r#"
query GetPostsForSitemap($first: Int!) {
  posts(first: $first, where: { status: PUBLISH }) {
    nodes {
      slug
      date
      modified
    }
  }
}"#;

pub const SITEMAP_PAGES: &str = r#"
query GetPagesForSitemap($first: Int!) {
  pages(first: $first, where: { status: PUBLISH }) {
    nodes {
      slug
      date
      modified
    }
  }
}"#;

pub const SITEMAP_CATEGORIES: &str = r#"
query GetCategoriesForSitemap($first: Int!) {
  categories(first: $first) {
    nodes {
      slug
    }
  }
}"#;

pub const HEALTH_CHECK: &str = r#"
query HealthCheck {
  generalSettings {
    title
    description
  }
}"#;
