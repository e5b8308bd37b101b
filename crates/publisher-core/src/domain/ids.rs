//! Entity identifiers: ResultContainer と ErrorRecord の ID
//!
//! どちらも ULID ですが、エンティティごとに URI の base が違います。
//! `Id<E>` の `E` で区別するので、container の ID を error の URI に
//! 使うようなミスはコンパイル時に弾かれます。
//!
//! - `mu:uuid` の値 = `Display`（ULID 文字列）
//! - エンティティ URI = `E::BASE` + ULID

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::vocab;

/// 種類ごとの URI base を持つエンティティ
pub trait Entity: Send + Sync + 'static {
    const BASE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {}

impl Entity for Container {
    const BASE: &'static str = vocab::DATA_CONTAINER_URI_PREFIX;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorEntity {}

impl Entity for ErrorEntity {
    const BASE: &'static str = vocab::ERROR_URI_PREFIX;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<E: Entity> {
    ulid: Ulid,
    #[serde(skip)]
    entity: PhantomData<E>,
}

pub type ContainerId = Id<Container>;
pub type ErrorId = Id<ErrorEntity>;

impl<E: Entity> Id<E> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            entity: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn uri(&self) -> String {
        format!("{}{}", E::BASE, self.ulid)
    }

    /// Recover the id from an entity URI of this kind.
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix(E::BASE)?.parse().ok()
    }
}

impl<E: Entity> From<Ulid> for Id<E> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<E: Entity> FromStr for Id<E> {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self::from_ulid)
    }
}

impl<E: Entity> fmt::Display for Id<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ulid, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_uris_use_their_own_base() {
        let ulid = Ulid::from_parts(1_700_000_000_000, 7);

        assert_eq!(
            ContainerId::from_ulid(ulid).uri(),
            format!("http://redpencil.data.gift/id/dataContainers/{ulid}")
        );
        assert_eq!(
            ErrorId::from_ulid(ulid).uri(),
            format!("http://redpencil.data.gift/id/jobs/error/{ulid}")
        );
    }

    #[test]
    fn uri_parses_back_only_for_the_same_kind() {
        let id = ErrorId::from_ulid(Ulid::new());

        assert_eq!(ErrorId::from_uri(&id.uri()), Some(id));
        assert_eq!(ContainerId::from_uri(&id.uri()), None);
        assert_eq!(ErrorId::from_uri("http://redpencil.data.gift/id/jobs/error/nope"), None);
    }

    #[test]
    fn serializes_as_a_bare_ulid() {
        let id = ContainerId::from_ulid(Ulid::new());
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<ContainerId>(&json).unwrap(), id);
    }
}
