//! # Block Kind Module
//!
//! This module defines the closed set of block and creature kinds that can be placed
//! in the world, along with the classification that decides which registries an
//! instance of each kind ends up in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumerates every kind that the placement engine knows how to instantiate.
///
/// The serialized names match the keys of the asset manifest, so a manifest entry
/// and a placement request refer to the same kind by the same string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    /// Bulk island material.
    Netherrack,
    /// Dark accent stone used for pillars, roofs and window frames.
    Blackstone,
    /// Building material for platforms, paths and fortress walls.
    NetherBricks,
    /// Light-emitting accent block.
    Glowstone,
    /// Marsh-like ground cover.
    SoulSand,
    /// The hazard material. Touching it forces the player out of first-person mode.
    Lava,
    /// Portal frame material.
    Obsidian,
    /// Portal interior. Visual only, the player can walk through it.
    PortalSurface,
    /// Large floating creature.
    Ghast,
    /// Floating fire creature.
    Blaze,
    /// Ground creature.
    Piglin,
    /// Ground creature.
    ZombifiedPiglin,
    /// Ground creature.
    Hoglin,
    /// Flying creature.
    Phantom,
    /// Satellite fortress structure.
    NetherFortress,
    /// Satellite fortress structure.
    SkyblockFortress,
    /// Satellite tunnel structure.
    NetherTunnel,
}

/// How an instance of a kind participates in the simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockCategory {
    /// Walkable, registered in the solid registry.
    Solid,
    /// Neither walkable nor hazardous.
    Passable,
    /// Registered in the hazard registry.
    Hazard,
    /// Registered in the creature list.
    Creature(CreatureClass),
}

/// Creature families, which differ in how far they wander.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CreatureClass {
    /// Flying creatures with a large wander radius.
    Aerial,
    /// Ground creatures with a small wander radius.
    Ground,
}

impl BlockKind {
    /// Every kind, in manifest order.
    pub const ALL: [BlockKind; 17] = [
        BlockKind::Netherrack,
        BlockKind::Blackstone,
        BlockKind::NetherBricks,
        BlockKind::Glowstone,
        BlockKind::SoulSand,
        BlockKind::Lava,
        BlockKind::Obsidian,
        BlockKind::PortalSurface,
        BlockKind::Ghast,
        BlockKind::Blaze,
        BlockKind::Piglin,
        BlockKind::ZombifiedPiglin,
        BlockKind::Hoglin,
        BlockKind::Phantom,
        BlockKind::NetherFortress,
        BlockKind::SkyblockFortress,
        BlockKind::NetherTunnel,
    ];

    /// Returns the manifest name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Netherrack => "netherrack",
            BlockKind::Blackstone => "blackstone",
            BlockKind::NetherBricks => "netherBricks",
            BlockKind::Glowstone => "glowstone",
            BlockKind::SoulSand => "soulSand",
            BlockKind::Lava => "lava",
            BlockKind::Obsidian => "obsidian",
            BlockKind::PortalSurface => "portalSurface",
            BlockKind::Ghast => "ghast",
            BlockKind::Blaze => "blaze",
            BlockKind::Piglin => "piglin",
            BlockKind::ZombifiedPiglin => "zombifiedPiglin",
            BlockKind::Hoglin => "hoglin",
            BlockKind::Phantom => "phantom",
            BlockKind::NetherFortress => "netherFortress",
            BlockKind::SkyblockFortress => "skyblockFortress",
            BlockKind::NetherTunnel => "netherTunnel",
        }
    }

    /// Looks a kind up by its manifest name.
    ///
    /// # Returns
    /// `None` if no kind carries that name
    pub fn from_name(name: &str) -> Option<Self> {
        BlockKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Classifies the kind.
    ///
    /// Lava and the portal interior are the only non-walkable block kinds. Creatures
    /// move every tick, so they go to the creature list instead of the static solid
    /// registry.
    pub fn category(self) -> BlockCategory {
        match self {
            BlockKind::Lava => BlockCategory::Hazard,
            BlockKind::PortalSurface => BlockCategory::Passable,
            BlockKind::Ghast | BlockKind::Blaze | BlockKind::Phantom => {
                BlockCategory::Creature(CreatureClass::Aerial)
            }
            BlockKind::Piglin | BlockKind::ZombifiedPiglin | BlockKind::Hoglin => {
                BlockCategory::Creature(CreatureClass::Ground)
            }
            _ => BlockCategory::Solid,
        }
    }

    /// Returns `true` if instances of this kind are walkable.
    pub fn is_solid(self) -> bool {
        self.category() == BlockCategory::Solid
    }

    /// Returns `true` if instances of this kind trigger a hazard contact.
    pub fn is_hazard(self) -> bool {
        self.category() == BlockCategory::Hazard
    }

    /// Returns `true` if instances of this kind are driven by the creature controller.
    pub fn is_creature(self) -> bool {
        self.creature_class().is_some()
    }

    /// Returns the creature family, if this kind is a creature.
    pub fn creature_class(self) -> Option<CreatureClass> {
        match self.category() {
            BlockCategory::Creature(class) => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
