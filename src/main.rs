use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use newsdigest::config::AppConfig;
use newsdigest::crawler::NewsApiClient;
use newsdigest::service::{NewsService, PageRequest, ResultView, Viewer};
use newsdigest::storage::{ArticleStore, Database, MemoryStore};
use newsdigest::utils::{logger, CancelSignal, NewsResult};

const CONFIG_PATH: &str = "config/settings.toml";

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(about = "按关键词搜索新闻，去重后按用户保存并分页浏览", long_about = None)]
struct Cli {
    /// 存储后端
    #[arg(long, value_enum, default_value_t = StorageKind::Sqlite, global = true)]
    storage: StorageKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Args, Clone, Copy)]
struct PageArgs {
    /// 页码（从 1 开始）
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,

    /// 每页条数，默认取配置 paging.default_page_size
    #[arg(long, allow_negative_numbers = true)]
    page_size: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化配置和数据库
    Init,
    /// 清空所有文章（仅 SQLite 存储）
    Clean,
    #[command(flatten)]
    News(NewsCommand),
}

#[derive(Subcommand)]
enum NewsCommand {
    /// 搜索关键词，保存新文章并返回该用户的匹配结果
    Search {
        keyword: String,
        /// 当前用户ID
        #[arg(short, long)]
        user: i64,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// 浏览所有文章
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    /// 浏览当前用户的文章
    Mine {
        #[arg(short, long)]
        user: i64,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// 浏览指定用户的文章
    User {
        owner: i64,
        /// 当前用户ID
        #[arg(long)]
        as_user: i64,
        /// 当前用户可以查看其他用户的文章
        #[arg(long)]
        admin: bool,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// 用户被删除后解除其文章归属
    DetachUser { user: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_command().await,
        Commands::Clean => clean_command(cli.storage).await,
        Commands::News(command) => news_command(cli.storage, command).await,
    }
}

async fn init_command() -> Result<()> {
    info!("初始化系统...");

    tokio::fs::create_dir_all("data").await?;
    tokio::fs::create_dir_all("config").await?;

    if Path::new(CONFIG_PATH).exists() {
        info!("配置文件已存在，保留: {}", CONFIG_PATH);
    } else {
        AppConfig::default().save(CONFIG_PATH)?;
        info!("已生成配置文件: {}", CONFIG_PATH);
    }

    let config = AppConfig::load()?;
    let db = Database::new(&config.database_url(), config.storage.max_connections).await?;
    db.init_schema().await?;

    info!("✅ 系统初始化完成！");
    info!("下一步: 在 {} 中设置 news_api.api_key，然后运行 'newsdigest search <关键词> --user <ID>'", CONFIG_PATH);
    Ok(())
}

async fn clean_command(storage: StorageKind) -> Result<()> {
    if storage == StorageKind::Memory {
        anyhow::bail!("内存存储不会持久化，无需清理；clean 只支持 --storage sqlite");
    }

    let config = AppConfig::load()?;
    let db = open_database(&config).await?;
    let removed = db.clear_articles().await?;
    info!("✅ 清理完成，共删除 {} 篇文章", removed);
    Ok(())
}

async fn news_command(storage: StorageKind, command: NewsCommand) -> Result<()> {
    let config = AppConfig::load()?;
    let store = open_store(storage, &config).await?;
    let cancel = cancel_on_ctrl_c();
    let page = |args: PageArgs| {
        PageRequest::new(args.page, args.page_size.unwrap_or(config.paging.default_page_size))
    };

    match command {
        NewsCommand::Search { keyword, user, paging } => {
            // 缺少 API key 是配置错误，直接退出
            let client = NewsApiClient::new(&config.news_api)?;
            let service = NewsService::new(Arc::new(client), store);
            emit(service.search(&keyword, user, page(paging), &cancel).await)
        }
        NewsCommand::List { paging } => {
            let service = NewsService::read_only(store);
            emit(service.list_all(page(paging), &cancel).await)
        }
        NewsCommand::Mine { user, paging } => {
            let service = NewsService::read_only(store);
            emit(service.list_mine(Viewer::user(user), page(paging), &cancel).await)
        }
        NewsCommand::User { owner, as_user, admin, paging } => {
            let viewer = Viewer {
                user_id: as_user,
                may_view_others: admin,
            };
            let service = NewsService::read_only(store);
            emit(service.list_for_user(viewer, owner, page(paging), &cancel).await)
        }
        NewsCommand::DetachUser { user } => emit(cancel.guard(store.detach_owner(user)).await),
    }
}

async fn open_database(config: &AppConfig) -> NewsResult<Database> {
    if let Some(parent) = Path::new(&config.storage.database_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database_url(), config.storage.max_connections).await?;
    db.init_schema().await?;
    Ok(db)
}

async fn open_store(kind: StorageKind, config: &AppConfig) -> NewsResult<Arc<dyn ArticleStore>> {
    match kind {
        StorageKind::Sqlite => Ok(Arc::new(open_database(config).await?)),
        StorageKind::Memory => {
            info!("使用内存存储，进程退出后数据不保留");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Ctrl+C 触发取消
fn cancel_on_ctrl_c() -> CancelSignal {
    let (handle, signal) = CancelSignal::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到停止信号，取消当前操作");
            handle.cancel();
        }
    });
    signal
}

/// 输出带成功标记的 JSON；致命错误直接返回
fn emit<T: Serialize>(result: NewsResult<T>) -> Result<()> {
    match result {
        Err(e) if e.is_fatal() => Err(e.into()),
        result => {
            println!("{}", serde_json::to_string_pretty(&ResultView::from(result))?);
            Ok(())
        }
    }
}
