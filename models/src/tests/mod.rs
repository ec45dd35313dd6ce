mod instance;
mod options;
mod scope;
