//! Request orchestration.
//!
//! Sequences validator → upstream client. No handling of its own: every
//! error is returned to the boundary untouched.

pub mod validator;

use crate::error::GatewayResult;
use crate::upstream::{Comment, Post, PostWithComments, UpstreamClient};

pub use validator::validate_post_id;

/// Read operations exposed by the gateway.
#[derive(Debug, Clone)]
pub struct PostService {
    client: UpstreamClient,
}

impl PostService {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn posts(&self, title: Option<&str>) -> GatewayResult<Vec<Post>> {
        self.client.list_posts(title).await
    }

    pub async fn post(&self, post_id: Option<&str>) -> GatewayResult<Post> {
        let id = validated(post_id)?;
        self.client.get_post(id).await
    }

    pub async fn post_with_comments(&self, post_id: Option<&str>) -> GatewayResult<PostWithComments> {
        let id = validated(post_id)?;
        self.client.get_post_with_comments(id).await
    }

    pub async fn comments_for_post(&self, post_id: Option<&str>) -> GatewayResult<Vec<Comment>> {
        let id = validated(post_id)?;
        self.client.get_comments_for_post(id).await
    }
}

fn validated(post_id: Option<&str>) -> GatewayResult<&str> {
    validate_post_id(post_id)?;
    // validate_post_id rejects None
    Ok(post_id.unwrap_or_default())
}
