use std::{collections::BTreeSet, sync::Arc};

use log::{debug, info, warn};
use vcplay_core::{ChatId, UserId};

use super::{AdminCache, LookupError, PrivilegeLookup};

/// Decides whether a caller may manage a chat's playback.
pub struct AuthorizationGate {
    super_users: BTreeSet<UserId>,
    cache: AdminCache,
    lookup: Arc<dyn PrivilegeLookup>,
}

impl AuthorizationGate {
    pub fn new(super_users: BTreeSet<UserId>, lookup: Arc<dyn PrivilegeLookup>) -> Self {
        Self {
            super_users,
            cache: AdminCache::new(),
            lookup,
        }
    }

    pub fn is_super_user(&self, user_id: UserId) -> bool {
        self.super_users.contains(&user_id)
    }

    /// Returns true if the caller is a super user or one of the chat's admins.
    ///
    /// Callers missing from the cached list trigger a fresh lookup.
    /// A failed lookup denies the caller and leaves the cache untouched.
    pub async fn is_authorized(&self, caller: UserId, chat_id: ChatId) -> bool {
        if self.is_super_user(caller) {
            return true;
        }

        if self.cache.contains(chat_id, caller) {
            return true;
        }

        match self.refresh(chat_id).await {
            Ok(admins) => admins.binary_search(&caller).is_ok(),
            Err(err) => {
                warn!("Denying {} in chat {}: {}", caller, chat_id, err);
                false
            }
        }
    }

    /// Replaces the chat's cached admins with a fresh lookup. Returns how many there are.
    pub async fn reload(&self, chat_id: ChatId) -> Result<usize, LookupError> {
        let admins = self.refresh(chat_id).await?;
        info!("Reloaded {} admins of chat {}", admins.len(), chat_id);

        Ok(admins.len())
    }

    pub fn invalidate(&self, chat_id: ChatId) {
        self.cache.invalidate(chat_id);
    }

    /// Forgets the admins of every chat.
    pub fn reset(&self) {
        self.cache.reset();
        info!("Admin cache reset");
    }

    pub fn cached(&self, chat_id: ChatId) -> Option<Vec<UserId>> {
        self.cache.get(chat_id)
    }

    async fn refresh(&self, chat_id: ChatId) -> Result<Vec<UserId>, LookupError> {
        let members = self.lookup.list_privileged(chat_id).await?;

        let mut admins: Vec<_> = members
            .into_iter()
            .filter(|m| m.is_privileged())
            .map(|m| m.user_id)
            .collect();

        admins.sort_unstable();
        admins.dedup();

        self.cache.set(chat_id, admins.clone());
        debug!("Chat {} has admins {:?}", chat_id, admins);

        Ok(admins)
    }
}
