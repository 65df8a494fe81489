//! InkMint — draw artwork on a raster canvas, publish it to IPFS through
//! Lighthouse, and mint it as an ERC-721 on Base. Also fronts a token
//! factory for one-click ERC-20 deployments and a gallery of owned NFTs.
//!
//! The crate splits into pure logic (`canvas`, `history`, `workflow`,
//! `collection`), chain/storage gateways behind port traits (`chain`,
//! `storage`), and the egui shell (`app`, `components`).

pub mod app;
pub mod canvas;
pub mod chain;
pub mod cli;
pub mod collection;
pub mod components;
pub mod config;
pub mod history;
pub mod logger;
pub mod storage;
pub mod theme;
pub mod workflow;
