//! Discord gateway adapter: turns messages and reaction-adds into
//! [`Incoming`] events and carries the dispatcher's replies back.

use std::sync::Arc;

use serenity::all::{
  ChannelId, Client, Context as Ctx, CreateEmbed, CreateEmbedFooter,
  CreateMessage, EditMessage, EventHandler, GatewayIntents, Http, Mentionable,
  Message, MessageId, Reaction, ReactionType, Ready, UserId as DiscordUserId,
};

use crate::{
  dispatch::{self, Actor, Command, Incoming, Surface},
  error::SurfaceError,
  model::{MessageLink, UserId},
  prelude::*,
  state::AppState,
  view::{Embed, Reply},
};

pub struct Plugin {
  token: String,
}

impl Plugin {
  pub fn new(token: impl Into<String>) -> Self {
    Self { token: token.into() }
  }
}

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "discord"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    info!("Starting Discord client...");

    let intents = GatewayIntents::GUILDS
      | GatewayIntents::GUILD_MESSAGES
      | GatewayIntents::DIRECT_MESSAGES
      | GatewayIntents::MESSAGE_CONTENT
      | GatewayIntents::GUILD_MESSAGE_REACTIONS
      | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let mut client = Client::builder(&self.token, intents)
      .event_handler(Handler { app })
      .await
      .context("Failed to build Discord client")?;

    client.start().await.context("Discord client stopped")?;
    Ok(())
  }
}

struct Handler {
  app: Arc<AppState>,
}

impl Handler {
  async fn handle(&self, ctx: &Ctx, incoming: Incoming) {
    let surface = DiscordSurface { http: ctx.http.clone() };

    if let Err(err) = dispatch::dispatch(&self.app, &surface, incoming).await {
      error!("Failed to handle event: {err}");
    }
  }
}

#[async_trait]
impl EventHandler for Handler {
  async fn ready(&self, _ctx: Ctx, ready: Ready) {
    info!("{} has connected to Discord!", ready.user.name);
  }

  async fn message(&self, ctx: Ctx, msg: Message) {
    if msg.author.bot {
      return;
    }
    let Some(command) = Command::parse(&msg.content, &self.app.config.prefix)
    else {
      return;
    };

    let actor = Actor {
      id: msg.author.id.get(),
      name: msg.author.name.clone(),
      mention: msg.author.mention().to_string(),
      bot: false,
    };
    let channel_id = msg.channel_id.get();

    self.handle(&ctx, Incoming::Command { actor, channel_id, command }).await;
  }

  async fn reaction_add(&self, ctx: Ctx, reaction: Reaction) {
    let ReactionType::Unicode(symbol) = &reaction.emoji else {
      return;
    };

    let user = match reaction.user(&ctx).await {
      Ok(user) => user,
      Err(err) => {
        warn!("Failed to resolve reacting user: {err}");
        return;
      }
    };

    let actor = Actor {
      id: user.id.get(),
      name: user.name.clone(),
      mention: user.mention().to_string(),
      bot: user.bot,
    };
    let message = MessageLink {
      message_id: reaction.message_id.get(),
      channel_id: reaction.channel_id.get(),
    };

    let incoming = Incoming::Reaction { actor, message, symbol: symbol.clone() };
    self.handle(&ctx, incoming).await;
  }
}

struct DiscordSurface {
  http: Arc<Http>,
}

fn surface_error(err: serenity::Error) -> SurfaceError {
  if let serenity::Error::Http(http) = &err
    && http.status_code().is_some_and(|code| code.as_u16() == 429)
  {
    return SurfaceError::RateLimited;
  }
  SurfaceError::Platform(err.to_string())
}

fn to_embed(embed: &Embed) -> CreateEmbed {
  let mut out = CreateEmbed::new()
    .title(&embed.title)
    .description(&embed.description)
    .colour(embed.tone.rgb());

  for field in &embed.fields {
    out = out.field(&field.name, &field.value, true);
  }
  if let Some(footer) = &embed.footer {
    out = out.footer(CreateEmbedFooter::new(footer));
  }
  out
}

fn unicode(symbol: &str) -> ReactionType {
  ReactionType::Unicode(symbol.to_string())
}

fn channel(message: MessageLink) -> ChannelId {
  ChannelId::new(message.channel_id)
}

#[async_trait]
impl Surface for DiscordSurface {
  async fn send(
    &self,
    channel_id: u64,
    reply: &Reply,
  ) -> Result<MessageLink, SurfaceError> {
    let mut builder = CreateMessage::new();
    if let Some(content) = &reply.content {
      builder = builder.content(content);
    }
    if let Some(embed) = &reply.embed {
      builder = builder.embed(to_embed(embed));
    }

    let msg = ChannelId::new(channel_id)
      .send_message(&self.http, builder)
      .await
      .map_err(surface_error)?;

    Ok(MessageLink {
      message_id: msg.id.get(),
      channel_id: msg.channel_id.get(),
    })
  }

  async fn edit(
    &self,
    message: MessageLink,
    reply: &Reply,
  ) -> Result<(), SurfaceError> {
    let mut builder = EditMessage::new();
    if let Some(content) = &reply.content {
      builder = builder.content(content);
    }
    if let Some(embed) = &reply.embed {
      builder = builder.embed(to_embed(embed));
    }

    channel(message)
      .edit_message(&self.http, MessageId::new(message.message_id), builder)
      .await
      .map_err(surface_error)?;
    Ok(())
  }

  async fn react(
    &self,
    message: MessageLink,
    symbol: &str,
  ) -> Result<(), SurfaceError> {
    channel(message)
      .create_reaction(
        &self.http,
        MessageId::new(message.message_id),
        unicode(symbol),
      )
      .await
      .map_err(surface_error)
  }

  async fn retract(
    &self,
    message: MessageLink,
    user: UserId,
    symbol: &str,
  ) -> Result<(), SurfaceError> {
    channel(message)
      .delete_reaction(
        &self.http,
        MessageId::new(message.message_id),
        Some(DiscordUserId::new(user)),
        unicode(symbol),
      )
      .await
      .map_err(surface_error)
  }
}
