/// Per-user resource quotas
///
/// Every user carries a [`Quota`]: either unlimited or a fixed ceiling on the
/// number of resources they may own. [`ResourceCreator`] counts a user's
/// existing resources and refuses creation once the ceiling is reached.
///
/// The count and the insert are separate store calls, so concurrent creations
/// for the same user can overshoot the ceiling by the number of racing
/// requests. The quota is a soft limit.
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::quota::ResourceCreator;
/// use chainstack_shared::clock::SystemClock;
/// use chainstack_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example(store: Arc<PgStore>) -> chainstack_shared::Result<()> {
/// let creator = ResourceCreator::new(store, Arc::new(SystemClock));
///
/// let resource = creator.create_resource(1).await?;
/// println!("created {}", resource.key);
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Resource, UserId};
use crate::store::{ResourceStore, UserStore};

/// Resource creation limit
///
/// Serialized as a bare number, or `null` for unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Quota {
    #[default]
    Unlimited,
    Limited(u32),
}

impl Quota {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Quota::Unlimited)
    }

    /// Whether a user already owning `count` resources may create another
    pub fn permits(&self, count: u64) -> bool {
        match self {
            Quota::Unlimited => true,
            Quota::Limited(limit) => count < u64::from(*limit),
        }
    }

    /// Decodes the nullable `quota` column
    ///
    /// NULL and legacy negative values both mean unlimited.
    pub fn from_column(value: Option<i32>) -> Self {
        match value.map(u32::try_from) {
            Some(Ok(limit)) => Quota::Limited(limit),
            _ => Quota::Unlimited,
        }
    }

    /// Encodes for the nullable `quota` column
    pub fn to_column(self) -> Option<i32> {
        match self {
            Quota::Unlimited => None,
            Quota::Limited(limit) => Some(i32::try_from(limit).unwrap_or(i32::MAX)),
        }
    }
}

impl From<Option<u32>> for Quota {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Quota::Unlimited, Quota::Limited)
    }
}

impl From<Quota> for Option<u32> {
    fn from(quota: Quota) -> Self {
        match quota {
            Quota::Unlimited => None,
            Quota::Limited(limit) => Some(limit),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Unlimited => f.write_str("unlimited"),
            Quota::Limited(limit) => write!(f, "{}", limit),
        }
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaCheck {
    /// Whether one more resource may be created
    pub allowed: bool,

    /// Resources currently owned
    pub current: u64,

    /// The user's quota
    pub quota: Quota,
}

/// Creates resources after checking the owner's quota
#[derive(Clone)]
pub struct ResourceCreator {
    users: Arc<dyn UserStore>,
    resources: Arc<dyn ResourceStore>,
    clock: Arc<dyn Clock>,
}

impl ResourceCreator {
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: UserStore + ResourceStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        let resources: Arc<dyn ResourceStore> = store;
        Self {
            users,
            resources,
            clock,
        }
    }

    /// Checks whether `user_id` may create another resource
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist, `Storage` if the store fails.
    pub async fn check(&self, user_id: UserId) -> Result<QuotaCheck> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(Error::NotFound("user"))?;

        let current = self.resources.count_resources(user_id).await?;

        Ok(QuotaCheck {
            allowed: user.quota.permits(current),
            current,
            quota: user.quota,
        })
    }

    /// Creates a resource owned by `user_id`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `QuotaExceeded` if the user already owns as many resources as allowed
    /// - `Storage` if the store fails
    pub async fn create_resource(&self, user_id: UserId) -> Result<Resource> {
        let check = self.check(user_id).await?;

        if !check.allowed {
            debug!(user_id, current = check.current, quota = %check.quota, "Quota exceeded");
            return Err(Error::QuotaExceeded {
                limit: match check.quota {
                    Quota::Limited(limit) => limit,
                    Quota::Unlimited => u32::MAX,
                },
                current: check.current,
            });
        }

        let resource = self
            .resources
            .insert_resource(Resource {
                key: Uuid::new_v4().to_string(),
                created_at: self.clock.now(),
                user_id,
            })
            .await?;

        info!(user_id, key = %resource.key, "Resource created");
        Ok(resource)
    }
}
