//! Launch flags. InkMint is a GUI application; flags only override the
//! compiled/environment configuration, they never start a headless mode.

use clap::Parser;

/// Draw artwork, publish it to IPFS, and mint it as an NFT.
#[derive(Parser, Debug, Default)]
#[command(name = "inkmint", about = "InkMint — draw and mint NFTs from your desktop")]
pub struct LaunchArgs {
    /// JSON-RPC endpoint to connect to.
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Collection (ERC-721) contract address.
    #[arg(long, value_name = "ADDRESS")]
    pub contract: Option<String>,

    /// Token factory contract address.
    #[arg(long, value_name = "ADDRESS")]
    pub factory: Option<String>,

    /// Storage API key for uploads.
    #[arg(long, value_name = "KEY")]
    pub storage_key: Option<String>,

    /// Chain id the mint workflow requires (decimal or 0x-hex).
    #[arg(long, value_name = "ID")]
    pub chain_id: Option<String>,
}
