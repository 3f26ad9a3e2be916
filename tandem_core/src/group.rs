// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group identity and master resolution.
//!
//! A *group* is an ordered set of media elements that play in lockstep. One
//! member is the master (the playback source of truth); the rest are slaves.
//! The master is the first member explicitly tagged as master, or the first
//! member in document order when none is tagged.

use alloc::vec::Vec;
use core::fmt;

/// Minimum number of members a group needs before it is synchronized.
pub const MIN_MEMBERS: usize = 2;

/// Identifies a registered group.
///
/// Backends assign ids in registration (document) order. Core code treats
/// them as opaque keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupId(pub u32);

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

/// A discovered group member, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member<M> {
    /// The member's media element.
    pub media: M,
    /// Whether the markup tags this member as the group's master.
    pub tagged_master: bool,
}

impl<M> Member<M> {
    /// A member with no master tag.
    #[must_use]
    pub const fn new(media: M) -> Self {
        Self {
            media,
            tagged_master: false,
        }
    }

    /// A member explicitly tagged as master.
    #[must_use]
    pub const fn master(media: M) -> Self {
        Self {
            media,
            tagged_master: true,
        }
    }
}

/// Returns the index of the master among `members`.
///
/// The first member for which `is_tagged` holds wins; otherwise the first
/// member is the master. Returns `None` only for an empty slice.
#[must_use]
pub fn resolve_master<T>(members: &[T], mut is_tagged: impl FnMut(&T) -> bool) -> Option<usize> {
    if members.is_empty() {
        return None;
    }
    Some(members.iter().position(&mut is_tagged).unwrap_or(0))
}

/// A group split into its master and slaves.
#[derive(Clone, Debug)]
pub struct GroupLayout<M> {
    /// The playback source of truth.
    pub master: M,
    /// Every member except the master, in document order.
    pub slaves: Vec<M>,
}

impl<M> GroupLayout<M> {
    /// Splits `members` into master and slaves.
    ///
    /// Returns `None` for groups with fewer than [`MIN_MEMBERS`] members;
    /// such groups are not synchronized.
    #[must_use]
    pub fn from_members(members: Vec<Member<M>>) -> Option<Self> {
        if members.len() < MIN_MEMBERS {
            return None;
        }
        let master_idx = resolve_master(&members, |m| m.tagged_master)?;

        let mut master = None;
        let mut slaves = Vec::with_capacity(members.len() - 1);
        for (idx, member) in members.into_iter().enumerate() {
            if idx == master_idx {
                master = Some(member.media);
            } else {
                slaves.push(member.media);
            }
        }
        Some(Self {
            master: master?,
            slaves,
        })
    }
}
