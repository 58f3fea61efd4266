//! Links placed in issue bodies.

pub const PLANB_BASE_URL: &str = "https://planb.network";
pub const GITHUB_CONTENT_URL: &str = "https://github.com/PlanB-Network/bitcoin-educational-content";
pub const WEBLATE_BASE_URL: &str =
  "https://weblate.planb.network/projects/planb-network-website/website-elements";

/// Lowercase, drop punctuation, join words with single dashes.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;
  for c in text.to_lowercase().chars() {
    if c.is_alphanumeric() || c == '_' {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else if c == '-' || c.is_whitespace() {
      pending_dash = true;
    }
  }
  slug
}

/// `{slug}-{uuid}`, or just the slug without a uuid.
fn slug_with_id(title: &str, uuid: Option<&str>) -> String {
  let slug = slugify(title);
  match uuid {
    Some(id) if !id.is_empty() => format!("{}-{}", slug, id),
    _ => slug,
  }
}

pub fn planb_course_url(title: &str, uuid: Option<&str>, language: &str) -> String {
  format!(
    "{}/{}/courses/{}",
    PLANB_BASE_URL,
    language,
    slug_with_id(title, uuid)
  )
}

pub fn planb_tutorial_url(
  category: &str,
  name: &str,
  title: &str,
  uuid: Option<&str>,
  language: &str,
) -> String {
  format!(
    "{}/{}/tutorials/{}/{}/{}",
    PLANB_BASE_URL,
    language,
    category,
    name,
    slug_with_id(title, uuid)
  )
}

pub fn planb_tutorial_section_url(section: &str, language: &str) -> String {
  format!("{}/{}/tutorials/{}", PLANB_BASE_URL, language, section)
}

fn github_blob(branch: &str, path: &str) -> String {
  format!("{}/blob/{}/{}", GITHUB_CONTENT_URL, branch, path)
}

/// Markdown sources as `(language, url)`: English first, then `language`
/// unless it is English.
fn github_markdown_urls(dir: &str, language: &str, branch: &str) -> Vec<(String, String)> {
  let base = github_blob(branch, dir);
  let mut urls = vec![("en".to_string(), format!("{}/en.md", base))];
  if language != "en" {
    urls.push((language.to_string(), format!("{}/{}.md", base, language)));
  }
  urls
}

pub fn github_course_urls(course_id: &str, language: &str, branch: &str) -> Vec<(String, String)> {
  github_markdown_urls(&format!("courses/{}", course_id), language, branch)
}

pub fn github_tutorial_urls(
  category: &str,
  name: &str,
  language: &str,
  branch: &str,
) -> Vec<(String, String)> {
  github_markdown_urls(&format!("tutorials/{}/{}", category, name), language, branch)
}

pub fn github_course_dir_url(course_id: &str, branch: &str) -> String {
  github_blob(branch, &format!("courses/{}", course_id))
}

pub fn github_course_assets_url(course_id: &str, branch: &str) -> String {
  github_blob(branch, &format!("courses/{}/assets", course_id))
}

pub fn github_tutorial_section_url(section: &str, branch: &str) -> String {
  github_blob(branch, &format!("tutorials/{}", section))
}

pub fn weblate_url(language: &str) -> String {
  format!("{}/{}/", WEBLATE_BASE_URL, language)
}
