mod balance;
mod restriction;
