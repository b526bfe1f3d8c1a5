//! A member's social graph and rating profile.

use tracing::info;

use crate::error::{CatalogError, Result};
use crate::pipeline::algebra::key_set;
use crate::pipeline::paginate::Paginator;
use crate::stats::histogram::RatingHistogram;
use crate::traits::client::CatalogClient;
use crate::traits::source::MemberPages;
use crate::types::config::{CollectRequest, MEMBER_PAGE_SIZE};
use crate::types::film::{HistogramSubject, ProfileStats};
use crate::types::record::{Keyed, Member};

/// Followers, following, blocked members and ratings of one user.
///
/// The profile is fetched once by [`UserNetwork::load`]; its counters give
/// the page counts of the member listings, which carry no paginator.
pub struct UserNetwork<'a> {
    client: &'a dyn CatalogClient,
    username: String,
    profile: ProfileStats,
    paginator: Paginator,
}

impl<'a> UserNetwork<'a> {
    pub async fn load(client: &'a dyn CatalogClient, username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let profile = client.fetch_profile(&username).await?;
        Ok(Self {
            client,
            username,
            profile,
            paginator: Paginator::default(),
        })
    }

    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile(&self) -> &ProfileStats {
        &self.profile
    }

    pub async fn followers(&self) -> Result<Vec<Member>> {
        self.members("followers", Some(self.profile.followers)).await
    }

    pub async fn following(&self) -> Result<Vec<Member>> {
        self.members("following", Some(self.profile.following)).await
    }

    /// Members blocked by the session user.
    pub async fn blocked(&self) -> Result<Vec<Member>> {
        if self.username != self.client.session_username() {
            return Err(CatalogError::invalid(
                "username",
                format!("only the session user's blocked list is visible, not {}'s", self.username),
            ));
        }
        self.members("blocked", self.profile.blocked).await
    }

    /// Members who follow back, in following order.
    pub async fn mutuals(&self) -> Result<Vec<Member>> {
        let followers = key_set(&self.followers().await?);
        let mut following = self.following().await?;
        following.retain(|m| followers.contains(&m.key()));
        Ok(following)
    }

    /// The user's rating distribution.
    pub async fn ratings(&self) -> Result<RatingHistogram> {
        let buckets = self
            .client
            .fetch_histogram(&HistogramSubject::User(self.username.clone()))
            .await?;
        RatingHistogram::from_buckets(&buckets)
    }

    /// Mean rating in stars, two decimals.
    pub async fn average_rating(&self) -> Result<f64> {
        Ok(self.ratings().await?.rounded_mean(2))
    }

    pub async fn total_ratings(&self) -> Result<u64> {
        Ok(self.ratings().await?.total(None))
    }

    async fn members(&self, view: &str, known_total: Option<u64>) -> Result<Vec<Member>> {
        let mut pages = MemberPages::new(self.client, format!("{}/{}/", self.username, view))
            .with_page_size(MEMBER_PAGE_SIZE);
        if let Some(total) = known_total {
            pages = pages.with_known_total(total);
        }
        let members = self.paginator.collect(&pages, &CollectRequest::all()).await?;
        info!(username = %self.username, view, members = members.len(), "Collected members");
        Ok(members)
    }
}
