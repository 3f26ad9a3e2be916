// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markup conventions and group discovery.

use tandem_core::group::{GroupId, Member};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, Element, HtmlVideoElement, NodeList};

use crate::media::WebVideo;

/// CSS selectors that identify groups, members, and masters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selectors {
    /// Matches a group container.
    pub group: &'static str,
    /// Matches a member video inside a group container.
    pub member: &'static str,
    /// Matches a member that should be the group's master.
    pub master: &'static str,
}

impl Selectors {
    /// `.sync-group`, `.sync-video`, and `.master-video`.
    pub const DEFAULT: Self = Self {
        group: ".sync-group",
        member: ".sync-video",
        master: ".master-video",
    };
}

impl Default for Selectors {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A group container and its member videos, in document order.
#[derive(Clone, Debug)]
pub struct DiscoveredGroup {
    /// Id assigned in document order across all group containers.
    pub id: GroupId,
    /// The container; this is what visibility is measured on.
    pub element: Element,
    /// Member videos. May hold fewer than two entries.
    pub members: Vec<Member<WebVideo>>,
}

/// Finds every group container in `document`.
///
/// Members matching `selectors.member` that are not `<video>` elements are
/// skipped. Ids are assigned to every container, including ones too small to
/// synchronize, so they stay stable across markup changes elsewhere.
pub fn discover(document: &Document, selectors: &Selectors) -> Result<Vec<DiscoveredGroup>, JsValue> {
    let containers = elements(&document.query_selector_all(selectors.group)?);
    let mut groups = Vec::with_capacity(containers.len());
    for (index, element) in containers.into_iter().enumerate() {
        let mut members = Vec::new();
        for candidate in elements(&element.query_selector_all(selectors.member)?) {
            let tagged_master = candidate.matches(selectors.master)?;
            let Ok(video) = candidate.dyn_into::<HtmlVideoElement>() else {
                continue;
            };
            members.push(Member {
                media: WebVideo(video),
                tagged_master,
            });
        }
        groups.push(DiscoveredGroup {
            id: GroupId(u32::try_from(index).unwrap_or(u32::MAX)),
            element,
            members,
        });
    }
    Ok(groups)
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
