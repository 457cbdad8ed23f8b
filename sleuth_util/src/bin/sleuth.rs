use ::{
    failure::Error,
    sleuth::SharedKnowledgeBase,
    sleuth_util::Opt,
    std::io,
    structopt::StructOpt,
};

fn main() -> Result<(), Error> {
    let opt = Opt::from_args();
    sleuth_util::init_logging(&opt);

    let kb = SharedKnowledgeBase::load(opt.config())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    sleuth_util::run(&kb, &opt, stdin.lock(), &mut stdout.lock())?;

    Ok(())
}
