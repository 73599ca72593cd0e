// ABOUTME: Deployment instructions for hosted PostgreSQL providers
// ABOUTME: Static text only; nothing is executed

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Railway,
    Heroku,
}

impl Platform {
    pub fn banner(&self) -> &'static str {
        match self {
            Platform::Railway => "🚂 Deploying to Railway...",
            Platform::Heroku => "🟣 Deploying to Heroku...",
        }
    }

    pub fn steps(&self) -> &'static [&'static str] {
        match self {
            Platform::Railway => &[
                "Make sure Railway CLI is installed: npm install -g @railway/cli",
                "Run: railway login",
                "Run: railway init",
                "Run: railway add postgresql",
                "Get your DATABASE_URL: railway variables",
                "Use the migrate command with your Railway DATABASE_URL",
            ],
            Platform::Heroku => &[
                "Make sure Heroku CLI is installed",
                "Run: heroku create your-app-name",
                "Run: heroku addons:create heroku-postgresql:hobby-dev",
                "Get your DATABASE_URL: heroku config:get DATABASE_URL",
                "Use the migrate command with your Heroku DATABASE_URL",
            ],
        }
    }
}

/// Numbered instructions for `platform`, one line per step
pub fn render_instructions(platform: Platform) -> String {
    let mut text = format!("{}\n", platform.banner());
    for (idx, step) in platform.steps().iter().enumerate() {
        text.push_str(&format!("{}. {}\n", idx + 1, step));
    }
    text
}

pub fn deploy_instructions(platform: Platform) {
    print!("{}", render_instructions(platform));
}
