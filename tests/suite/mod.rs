mod journal;
mod session;
