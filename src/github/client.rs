use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api::{ProjectApi, RepoApi};
use super::api_types::{
  reserialize, ApiAddItemData, ApiBranch, ApiIssue, ApiOrgProjectsData, ApiProjectFieldsData,
  ApiUser, GraphqlResponse,
};
use super::types::{FieldValue, Issue, NewIssue, ProjectField, ProjectSummary};
use crate::config::GithubConfig;
use crate::error::{Error, Result};

const BRANCHES_PER_PAGE: usize = 100;
const PROJECTS_PER_ORG: usize = 20;

const ADD_ITEM_MUTATION: &str = r#"
mutation($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item {
      id
    }
  }
}
"#;

const PROJECT_FIELDS_QUERY: &str = r#"
query($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 50) {
        nodes {
          ... on ProjectV2Field {
            id
            name
          }
          ... on ProjectV2SingleSelectField {
            id
            name
            options {
              id
              name
            }
          }
        }
      }
    }
  }
}
"#;

const UPDATE_FIELD_MUTATION: &str = r#"
mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: {projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value}
  ) {
    projectV2Item {
      id
    }
  }
}
"#;

const ORG_PROJECTS_QUERY: &str = r#"
query($org: String!, $first: Int!) {
  organization(login: $org) {
    projectsV2(first: $first) {
      nodes {
        id
        title
        number
        url
        closed
      }
    }
  }
}
"#;

/// GitHub REST + GraphQL client wrapper
#[derive(Clone)]
pub struct GithubClient {
  http: reqwest::Client,
  api_url: Url,
  owner: String,
  repo: String,
}

impl GithubClient {
  pub fn new(config: &GithubConfig, token: &str) -> Result<Self> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
      .map_err(|_| Error::invalid("token", "contains characters not allowed in a header"))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(
      USER_AGENT,
      HeaderValue::from_static(concat!("issuesmith/", env!("CARGO_PKG_VERSION"))),
    );

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| Error::upstream("Failed to create GitHub client", e))?;

    // Trailing slash so relative joins keep any path prefix (GHES: /api/v3/)
    let base = format!("{}/", config.api_url.trim_end_matches('/'));
    let api_url = Url::parse(&base).map_err(|e| Error::invalid("github.api_url", e.to_string()))?;

    Ok(Self {
      http,
      api_url,
      owner: config.owner.clone(),
      repo: config.repo.clone(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .api_url
      .join(path.trim_start_matches('/'))
      .map_err(|e| Error::invalid("endpoint", e.to_string()))
  }

  fn repo_endpoint(&self, path: &str) -> Result<Url> {
    self.endpoint(&format!("repos/{}/{}/{}", self.owner, self.repo, path))
  }

  /// GraphQL lives at `/graphql` on github.com and at `/api/graphql` on
  /// Enterprise Server, whose REST base is `/api/v3`.
  fn graphql_endpoint(&self) -> Result<Url> {
    let base = self.api_url.path().trim_end_matches('/');
    match base.strip_suffix("/v3") {
      Some(prefix) => self
        .api_url
        .join(&format!("{}/graphql", prefix))
        .map_err(|e| Error::invalid("endpoint", e.to_string())),
      None => self.endpoint("graphql"),
    }
  }

  async fn get_json<T: DeserializeOwned>(&self, context: &str, url: Url) -> Result<T> {
    debug!(%url, "GET");
    let response = self.http.get(url).send().await?;
    Self::decode(context, None, response).await
  }

  /// `lookup` names what a 404 means for calls where absence is an answer
  /// rather than a failure. Every other non-2xx reply is an upstream failure.
  async fn decode<T: DeserializeOwned>(
    context: &str,
    lookup: Option<(&'static str, &str)>,
    response: Response,
  ) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(status_error(context, lookup, status, &body));
    }
    response
      .json::<T>()
      .await
      .map_err(|e| Error::upstream(context, format!("invalid response: {}", e)))
  }

  /// Run a GraphQL operation. An `errors` array counts as failure even on 200.
  async fn graphql<T: DeserializeOwned>(
    &self,
    context: &str,
    query: &str,
    variables: Value,
  ) -> Result<T> {
    let url = self.graphql_endpoint()?;
    let response = self
      .http
      .post(url)
      .json(&json!({ "query": query, "variables": variables }))
      .send()
      .await?;

    let body: GraphqlResponse<T> = Self::decode(context, None, response).await?;
    if !body.errors.is_empty() {
      let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
      return Err(Error::upstream(context, format!("GraphQL errors: {}", messages.join("; "))));
    }
    body
      .data
      .ok_or_else(|| Error::upstream(context, "response has no data"))
  }

  fn parse_issue(context: &str, raw: Value) -> Result<Issue> {
    let api: ApiIssue =
      reserialize(&raw).map_err(|e| Error::upstream(context, format!("invalid issue: {}", e)))?;
    Ok(api.into_issue(raw))
  }
}

#[async_trait]
impl RepoApi for GithubClient {
  /// List all branches, following pagination
  async fn list_branches(&self) -> Result<Vec<String>> {
    let mut all_branches = Vec::new();
    let mut page = 1usize;

    loop {
      let mut url = self.repo_endpoint("branches")?;
      url
        .query_pairs_mut()
        .append_pair("per_page", &BRANCHES_PER_PAGE.to_string())
        .append_pair("page", &page.to_string());

      let branches: Vec<ApiBranch> = self.get_json("Failed to list branches", url).await?;
      let count = branches.len();
      all_branches.extend(branches.into_iter().map(|b| b.name));

      if count < BRANCHES_PER_PAGE {
        break;
      }
      page += 1;
    }

    Ok(all_branches)
  }

  async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
    let url = self.repo_endpoint("issues")?;
    let response = self.http.post(url).json(issue).send().await?;
    let raw: Value = Self::decode("Failed to create issue", None, response).await?;
    Self::parse_issue("Failed to create issue", raw)
  }

  async fn get_issue(&self, number: u64) -> Result<Issue> {
    let url = self.repo_endpoint(&format!("issues/{}", number))?;
    let context = format!("Failed to get issue #{}", number);
    debug!(%url, "GET");
    let response = self.http.get(url).send().await?;
    let name = format!("#{}", number);
    let raw: Value = Self::decode(&context, Some(("issue", &name)), response).await?;
    Self::parse_issue(&context, raw)
  }

  async fn validate_token(&self) -> Result<String> {
    let user: ApiUser = self
      .get_json("Failed to authenticate", self.endpoint("user")?)
      .await?;

    // The token must also see the repository
    let mut url = self.repo_endpoint("issues")?;
    url
      .query_pairs_mut()
      .append_pair("state", "open")
      .append_pair("per_page", "1");
    let _: Value = self.get_json("Failed to access repository", url).await?;

    Ok(user.login)
  }
}

#[async_trait]
impl ProjectApi for GithubClient {
  async fn add_item_to_project(&self, project_id: &str, content_id: &str) -> Result<String> {
    let context = "Failed to add issue to project";
    let data: ApiAddItemData = self
      .graphql(
        context,
        ADD_ITEM_MUTATION,
        json!({ "projectId": project_id, "contentId": content_id }),
      )
      .await?;

    data
      .add_item
      .and_then(|payload| payload.item)
      .map(|item| item.id)
      .ok_or_else(|| Error::upstream(context, "response has no item id"))
  }

  async fn project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>> {
    let data: ApiProjectFieldsData = self
      .graphql(
        "Failed to get project fields",
        PROJECT_FIELDS_QUERY,
        json!({ "projectId": project_id }),
      )
      .await?;

    data
      .into_fields()
      .ok_or_else(|| Error::not_found("project", project_id))
  }

  async fn update_item_field(
    &self,
    project_id: &str,
    item_id: &str,
    field_id: &str,
    value: &FieldValue,
  ) -> Result<()> {
    let _: Value = self
      .graphql(
        "Failed to update project field",
        UPDATE_FIELD_MUTATION,
        json!({
          "projectId": project_id,
          "itemId": item_id,
          "fieldId": field_id,
          "value": value,
        }),
      )
      .await?;
    Ok(())
  }

  async fn list_projects(&self, org: &str) -> Result<Vec<ProjectSummary>> {
    let data: ApiOrgProjectsData = self
      .graphql(
        "Failed to list projects",
        ORG_PROJECTS_QUERY,
        json!({ "org": org, "first": PROJECTS_PER_ORG }),
      )
      .await?;

    data
      .into_projects()
      .ok_or_else(|| Error::not_found("organization", org))
  }
}

fn status_error(
  context: &str,
  lookup: Option<(&'static str, &str)>,
  status: StatusCode,
  body: &str,
) -> Error {
  match lookup {
    Some((kind, name)) if status == StatusCode::NOT_FOUND => Error::not_found(kind, name),
    _ => Error::upstream(context, format!("{}: {}", status, body)),
  }
}
