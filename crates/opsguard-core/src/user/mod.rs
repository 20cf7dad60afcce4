use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::DomainError;
use crate::ids::{TeamId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    phone: Option<String>,
    push_token: Option<String>,
    whatsapp_id: Option<String>,
    webhook_url: Option<String>,
}

impl User {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            phone: None,
            push_token: None,
            whatsapp_id: None,
            webhook_url: None,
        }
    }

    /// Whether this user has a destination for the given channel.
    pub fn reachable_on(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => true,
            Channel::Sms => self.phone.is_some(),
            Channel::Push => self.push_token.is_some(),
            Channel::WhatsApp => self.whatsapp_id.is_some(),
            Channel::Webhook => self.webhook_url.is_some(),
        }
    }

    pub fn set_phone(&mut self, phone: String) {
        self.phone = Some(phone);
    }

    pub fn set_push_token(&mut self, token: String) {
        self.push_token = Some(token);
    }

    pub fn set_whatsapp_id(&mut self, id: String) {
        self.whatsapp_id = Some(id);
    }

    pub fn set_webhook_url(&mut self, url: String) {
        self.webhook_url = Some(url);
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    lead: UserId,
    members: Vec<UserId>,
}

impl Team {
    pub fn new(name: String, lead: UserId, members: Vec<UserId>) -> Result<Self, DomainError> {
        if members.is_empty() {
            return Err(DomainError::TeamRequiresMember);
        }
        Ok(Self {
            id: TeamId::new(),
            name,
            lead,
            members,
        })
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lead(&self) -> &UserId {
        &self.lead
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }
}
