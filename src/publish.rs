//! Delivering the report: stdout preview or a GitHub pull request comment.

use std::io::Write;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sink for review comments on a numbered pull request.
pub trait CommentSink {
    /// Attach `body` as a new comment on pull request `number` of `repo`
    /// (`owner/name`). Returns a link to the created comment when known.
    fn post_comment(&self, repo: &str, number: u64, body: &str) -> Result<Option<String>>;
}

/// Where a finished report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// Print to standard output.
    Preview,
    PullRequest { repo: String, number: u64 },
}

/// Print or post the report. Network and auth failures are fatal.
pub fn publish(
    target: &PublishTarget,
    sink: &dyn CommentSink,
    text: &str,
    out: &mut dyn Write,
) -> Result<()> {
    match target {
        PublishTarget::Preview => writeln!(out, "{text}").map_err(Error::Output),
        PublishTarget::PullRequest { repo, number } => {
            let link = sink.post_comment(repo, *number, text)?;
            match link {
                Some(url) => log::info!("posted report to {repo}#{number}: {url}"),
                None => log::info!("posted report to {repo}#{number}"),
            }
            Ok(())
        }
    }
}

/// Sink used when no credentials were supplied; refuses every post.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unauthenticated;

impl CommentSink for Unauthenticated {
    fn post_comment(&self, repo: &str, number: u64, _: &str) -> Result<Option<String>> {
        Err(Error::Config(format!(
            "cannot post to {repo}#{number} without a GitHub token"
        )))
    }
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    state: String,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    html_url: Option<String>,
}

/// Minimal blocking GitHub REST client.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Config("GitHub token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("checkcode/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn pull_request(&self, repo: &str, number: u64) -> Result<PullRequest> {
        let url = format!("{}/repos/{repo}/pulls/{number}", self.api_url);
        log::debug!("GET {url}");
        Ok(self.http.get(url).send()?.error_for_status()?.json()?)
    }
}

impl CommentSink for GitHubClient {
    fn post_comment(&self, repo: &str, number: u64, body: &str) -> Result<Option<String>> {
        let pr = self.pull_request(repo, number)?;
        log::debug!("found {repo}#{} ({})", pr.number, pr.state);

        // Pull request conversation comments live on the issues endpoint.
        let url = format!("{}/repos/{repo}/issues/{number}/comments", self.api_url);
        log::debug!("POST {url}");
        let created: CreatedComment = self
            .http
            .post(url)
            .json(&NewComment { body })
            .send()?
            .error_for_status()?
            .json()?;
        Ok(created.html_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        posts: RefCell<Vec<(String, u64, String)>>,
    }

    impl CommentSink for Recorder {
        fn post_comment(&self, repo: &str, number: u64, body: &str) -> Result<Option<String>> {
            self.posts
                .borrow_mut()
                .push((repo.to_string(), number, body.to_string()));
            Ok(None)
        }
    }

    struct Refusing;

    impl CommentSink for Refusing {
        fn post_comment(&self, _: &str, _: u64, _: &str) -> Result<Option<String>> {
            Err(Error::Config("bad credentials".into()))
        }
    }

    #[test]
    fn preview_does_not_post() {
        let sink = Recorder::default();
        let mut out = Vec::new();
        publish(&PublishTarget::Preview, &sink, "report", &mut out).unwrap();
        assert!(sink.posts.borrow().is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "report\n");
    }

    #[test]
    fn pull_request_target_posts_once() {
        let sink = Recorder::default();
        let target = PublishTarget::PullRequest {
            repo: "life360/platform".into(),
            number: 7664,
        };
        let mut out = Vec::new();
        publish(&target, &sink, "report", &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(
            *sink.posts.borrow(),
            vec![("life360/platform".to_string(), 7664, "report".to_string())]
        );
    }

    #[test]
    fn sink_failure_is_fatal() {
        let target = PublishTarget::PullRequest {
            repo: "life360/platform".into(),
            number: 1,
        };
        assert!(publish(&target, &Refusing, "report", &mut Vec::new()).is_err());
    }

    #[test]
    fn unauthenticated_sink_refuses() {
        let target = PublishTarget::PullRequest {
            repo: "life360/platform".into(),
            number: 3,
        };
        let err = publish(&target, &Unauthenticated, "report", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("life360/platform#3"));
    }

    #[test]
    fn client_rejects_token_with_newline() {
        assert!(matches!(
            GitHubClient::new("https://api.github.com", "abc\ndef"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", "t0ken").unwrap();
        assert_eq!(client.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn comment_payload_shape() {
        let json = serde_json::to_value(NewComment { body: "hi" }).unwrap();
        assert_eq!(json, serde_json::json!({ "body": "hi" }));
    }

    #[test]
    fn created_comment_tolerates_extra_fields() {
        let c: CreatedComment = serde_json::from_str(
            r#"{"id": 1, "html_url": "https://github.com/o/r/pull/1#issuecomment-1", "body": "x"}"#,
        )
        .unwrap();
        assert_eq!(
            c.html_url.as_deref(),
            Some("https://github.com/o/r/pull/1#issuecomment-1")
        );
    }
}
