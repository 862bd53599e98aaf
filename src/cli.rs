use clap::Parser;

use crate::page::PageId;

#[derive(Parser, Debug)]
#[command(name = "authdash", version, about = "Terminal dashboard for your ModernAuth server")]
pub struct Args {
    /// Base URL of the dashboard API (e.g., "https://auth.example.org")
    #[arg(short, long)]
    pub backend_url: Option<String>,

    /// Dashboard access code used to authenticate API calls
    #[arg(short, long, env = "AUTHDASH_ACCESS_CODE", hide_env_values = true)]
    pub access_code: Option<String>,

    /// Page to open on startup
    #[arg(short, long, value_enum)]
    pub page: Option<PageId>,
}
