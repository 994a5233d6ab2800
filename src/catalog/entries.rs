//! Static app and content-category tables.
//!
//! Entry order matters: keyword classification keeps the first entry that
//! reaches the best score, and baseline lookup keeps the first containment
//! match.

use super::{AppEntry, CategoryInfo, ImpactTier};
use crate::db::models::ContentCategory;

use ContentCategory::*;
use ImpactTier::*;

const fn entry(
    key: &'static str,
    category: ContentCategory,
    tier: ImpactTier,
    keywords: &'static [&'static str],
) -> AppEntry {
    AppEntry {
        key,
        category,
        tier,
        keywords,
    }
}

pub(super) static APPS: &[AppEntry] = &[
    // Social Media
    entry("instagram", SocialMedia, ModerateRisk, &["instagram", "insta", "@"]),
    entry("facebook", SocialMedia, ModerateRisk, &["facebook", "fb", "meta"]),
    entry("twitter", SocialMedia, ModerateRisk, &["twitter", "x.com", "tweet"]),
    entry("tiktok", SocialMedia, HighRisk, &["tiktok", "fyp", "for you"]),
    entry("snapchat", SocialMedia, ModerateRisk, &["snapchat", "snap"]),
    entry("linkedin", Professional, Positive, &["linkedin", "connections"]),
    entry("reddit", SocialMedia, ModerateRisk, &["reddit", "subreddit", "r/"]),
    entry("pinterest", SocialMedia, Neutral, &["pinterest", "pin"]),
    entry("tumblr", SocialMedia, ModerateRisk, &["tumblr"]),
    entry("discord", Messaging, Neutral, &["discord", "server"]),
    entry("threads", SocialMedia, ModerateRisk, &["threads"]),
    entry("mastodon", SocialMedia, Neutral, &["mastodon", "toot"]),
    entry("bluesky", SocialMedia, Neutral, &["bluesky", "bsky"]),

    // Video Streaming
    entry("youtube", Video, Variable, &["youtube", "yt", "subscribe"]),
    entry("netflix", Entertainment, ModerateRisk, &["netflix", "watch now"]),
    entry("prime_video", Entertainment, ModerateRisk, &["prime video", "amazon video"]),
    entry("disney_plus", Entertainment, Neutral, &["disney+", "disney plus"]),
    entry("hulu", Entertainment, ModerateRisk, &["hulu"]),
    entry("hbo_max", Entertainment, ModerateRisk, &["hbo", "max"]),
    entry("twitch", Entertainment, ModerateRisk, &["twitch", "stream", "live"]),
    entry("vimeo", Video, Neutral, &["vimeo"]),
    entry("crunchyroll", Entertainment, Neutral, &["crunchyroll", "anime"]),

    // Messaging
    entry("whatsapp", Messaging, Neutral, &["whatsapp", "wa.me"]),
    entry("telegram", Messaging, Neutral, &["telegram", "t.me"]),
    entry("messenger", Messaging, Neutral, &["messenger", "fb messenger"]),
    entry("imessage", Messaging, Neutral, &["imessage", "messages"]),
    entry("slack", Work, Positive, &["slack", "channel"]),
    entry("teams", Work, Positive, &["teams", "microsoft teams"]),
    entry("zoom", Work, Positive, &["zoom", "meeting"]),
    entry("google_meet", Work, Positive, &["google meet", "meet.google"]),
    entry("webex", Work, Positive, &["webex", "cisco"]),
    entry("signal", Messaging, Neutral, &["signal"]),

    // Productivity & Work
    entry("gmail", Work, Positive, &["gmail", "inbox"]),
    entry("outlook", Work, Positive, &["outlook", "microsoft outlook"]),
    entry("google_docs", Work, Positive, &["google docs", "docs.google"]),
    entry("google_sheets", Work, Positive, &["google sheets", "sheets.google"]),
    entry("google_slides", Work, Positive, &["google slides", "slides.google"]),
    entry("microsoft_word", Work, Positive, &["word", "microsoft word", ".docx"]),
    entry("microsoft_excel", Work, Positive, &["excel", "spreadsheet", ".xlsx"]),
    entry("microsoft_powerpoint", Work, Positive, &["powerpoint", "ppt", ".pptx"]),
    entry("notion", Work, Positive, &["notion", "workspace"]),
    entry("trello", Work, Positive, &["trello", "board"]),
    entry("asana", Work, Positive, &["asana", "task"]),
    entry("jira", Work, Positive, &["jira", "atlassian"]),
    entry("confluence", Work, Positive, &["confluence"]),
    entry("monday", Work, Positive, &["monday.com"]),
    entry("evernote", Work, Positive, &["evernote"]),
    entry("dropbox", Work, Positive, &["dropbox"]),
    entry("google_drive", Work, Positive, &["google drive", "drive.google"]),
    entry("onedrive", Work, Positive, &["onedrive"]),
    entry("figma", Work, Positive, &["figma", "design"]),
    entry("canva", Work, Positive, &["canva"]),
    entry("airtable", Work, Positive, &["airtable"]),

    // Development
    entry("github", Work, Positive, &["github", "repository", "commit"]),
    entry("gitlab", Work, Positive, &["gitlab"]),
    entry("vscode", Work, Positive, &["visual studio code", "vscode"]),
    entry("xcode", Work, Positive, &["xcode"]),
    entry("android_studio", Work, Positive, &["android studio"]),
    entry("terminal", Work, Positive, &["terminal", "command line", "bash"]),
    entry("stackoverflow", Educational, Positive, &["stackoverflow", "stack overflow"]),
    entry("codepen", Work, Positive, &["codepen"]),
    entry("replit", Educational, Positive, &["replit"]),

    // Educational
    entry("coursera", Educational, Positive, &["coursera", "course"]),
    entry("udemy", Educational, Positive, &["udemy"]),
    entry("khan_academy", Educational, Positive, &["khan academy", "khanacademy"]),
    entry("edx", Educational, Positive, &["edx"]),
    entry("duolingo", Educational, Positive, &["duolingo", "language learning"]),
    entry("quizlet", Educational, Positive, &["quizlet", "flashcards"]),
    entry("wikipedia", Educational, Positive, &["wikipedia", "wiki"]),
    entry("medium", Educational, Positive, &["medium", "read more"]),
    entry("google_scholar", Educational, Positive, &["google scholar", "scholar.google"]),
    entry("brilliant", Educational, Positive, &["brilliant.org"]),
    entry("skillshare", Educational, Positive, &["skillshare"]),
    entry("linkedin_learning", Educational, Positive, &["linkedin learning"]),

    // Shopping
    entry("amazon", Shopping, ModerateRisk, &["amazon", "buy now", "add to cart"]),
    entry("ebay", Shopping, ModerateRisk, &["ebay", "bid"]),
    entry("etsy", Shopping, Neutral, &["etsy", "handmade"]),
    entry("shopify", Shopping, ModerateRisk, &["shopify"]),
    entry("walmart", Shopping, ModerateRisk, &["walmart"]),
    entry("target", Shopping, ModerateRisk, &["target"]),
    entry("alibaba", Shopping, ModerateRisk, &["alibaba", "aliexpress"]),
    entry("wish", Shopping, ModerateRisk, &["wish.com"]),

    // Gaming
    entry("steam", Gaming, ModerateRisk, &["steam", "store"]),
    entry("epic_games", Gaming, ModerateRisk, &["epic games", "fortnite"]),
    entry("roblox", Gaming, ModerateRisk, &["roblox"]),
    entry("minecraft", Gaming, Neutral, &["minecraft"]),
    entry("playstation", Gaming, ModerateRisk, &["playstation", "psn"]),
    entry("xbox", Gaming, ModerateRisk, &["xbox", "game pass"]),
    entry("nintendo", Gaming, Neutral, &["nintendo", "switch"]),
    entry("blizzard", Gaming, ModerateRisk, &["blizzard", "battle.net"]),
    entry("league_of_legends", Gaming, HighRisk, &["league of legends", "lol"]),
    entry("valorant", Gaming, ModerateRisk, &["valorant"]),
    entry("genshin", Gaming, ModerateRisk, &["genshin impact", "genshin"]),

    // News
    entry("cnn", News, Variable, &["cnn", "breaking news"]),
    entry("bbc", News, Variable, &["bbc", "bbc news"]),
    entry("nytimes", News, Variable, &["nytimes", "new york times"]),
    entry("washington_post", News, Variable, &["washington post", "wapo"]),
    entry("reuters", News, Neutral, &["reuters"]),
    entry("ap_news", News, Neutral, &["ap news", "associated press"]),
    entry("guardian", News, Variable, &["guardian", "theguardian"]),
    entry("huffpost", News, Variable, &["huffpost", "huffington"]),
    entry("fox_news", News, Variable, &["fox news"]),
    entry("google_news", News, Variable, &["google news", "news.google"]),

    // Health & Fitness
    entry("strava", Health, Positive, &["strava", "activity"]),
    entry("fitbit", Health, Positive, &["fitbit"]),
    entry("myfitnesspal", Health, Positive, &["myfitnesspal", "calories"]),
    entry("headspace", Health, Positive, &["headspace", "meditation"]),
    entry("calm", Health, Positive, &["calm", "sleep", "relax"]),
    entry("peloton", Health, Positive, &["peloton"]),
    entry("apple_health", Health, Positive, &["apple health", "health app"]),
    entry("nike_run", Health, Positive, &["nike run", "nike training"]),

    // Finance
    entry("banking", Finance, Neutral, &["bank", "account", "balance"]),
    entry("robinhood", Finance, ModerateRisk, &["robinhood", "stocks"]),
    entry("coinbase", Finance, ModerateRisk, &["coinbase", "crypto"]),
    entry("paypal", Finance, Neutral, &["paypal"]),
    entry("venmo", Finance, Neutral, &["venmo"]),
    entry("mint", Finance, Positive, &["mint", "budget"]),

    // Travel
    entry("google_maps", Utility, Positive, &["google maps", "maps.google", "directions"]),
    entry("uber", Utility, Neutral, &["uber", "ride"]),
    entry("lyft", Utility, Neutral, &["lyft"]),
    entry("airbnb", Travel, Neutral, &["airbnb"]),
    entry("booking", Travel, Neutral, &["booking.com"]),
    entry("expedia", Travel, Neutral, &["expedia"]),
    entry("tripadvisor", Travel, Neutral, &["tripadvisor"]),

    // Food
    entry("doordash", Food, Neutral, &["doordash"]),
    entry("ubereats", Food, Neutral, &["uber eats", "ubereats"]),
    entry("grubhub", Food, Neutral, &["grubhub"]),
    entry("instacart", Food, Neutral, &["instacart"]),
    entry("yelp", Food, Neutral, &["yelp", "reviews"]),

    // Music
    entry("spotify", Music, Positive, &["spotify", "playlist"]),
    entry("apple_music", Music, Positive, &["apple music"]),
    entry("soundcloud", Music, Neutral, &["soundcloud"]),
    entry("pandora", Music, Positive, &["pandora"]),
    entry("youtube_music", Music, Positive, &["youtube music"]),

    // Dating
    entry("tinder", Dating, ModerateRisk, &["tinder", "swipe"]),
    entry("bumble", Dating, ModerateRisk, &["bumble"]),
    entry("hinge", Dating, ModerateRisk, &["hinge"]),
    entry("okcupid", Dating, ModerateRisk, &["okcupid"]),

    // AI Tools
    entry("chatgpt", AiTools, Positive, &["chatgpt", "openai"]),
    entry("claude", AiTools, Positive, &["claude", "anthropic"]),
    entry("midjourney", AiTools, Neutral, &["midjourney"]),
    entry("dalle", AiTools, Neutral, &["dall-e", "dalle"]),
    entry("perplexity", AiTools, Positive, &["perplexity"]),
    entry("copilot", AiTools, Positive, &["copilot", "github copilot"]),];

const fn category(
    category: ContentCategory,
    description: &'static str,
    default_tier: ImpactTier,
) -> CategoryInfo {
    CategoryInfo {
        category,
        description,
        default_tier,
    }
}

pub(super) static CATEGORIES: &[CategoryInfo] = &[
    category(SocialMedia, "Social networking content", ModerateRisk),
    category(Video, "Video content", Variable),
    category(Entertainment, "Entertainment and leisure", ModerateRisk),
    category(Messaging, "Communication and messaging", Neutral),
    category(Work, "Work and productivity", Positive),
    category(Professional, "Professional networking", Positive),
    category(Educational, "Learning and education", Positive),
    category(Shopping, "Online shopping", ModerateRisk),
    category(Gaming, "Gaming content", ModerateRisk),
    category(News, "News and current events", Variable),
    category(Health, "Health and fitness", Positive),
    category(Finance, "Financial services", Neutral),
    category(Utility, "Utility apps", Neutral),
    category(Travel, "Travel planning", Neutral),
    category(Food, "Food delivery and dining", Neutral),
    category(Music, "Music streaming", Positive),
    category(Dating, "Dating apps", ModerateRisk),
    category(AiTools, "AI assistants and tools", Positive),
    category(Other, "Other content", Neutral),
];
